mod error_paths;
mod load;
mod roundtrip;
