pub mod orbits;
