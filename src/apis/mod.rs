pub mod easy_navier_stokes;
