mod geometry;
