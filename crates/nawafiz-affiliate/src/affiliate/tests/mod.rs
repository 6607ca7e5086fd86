mod common;
mod gate;
mod leads;
