mod common;
mod listings;
