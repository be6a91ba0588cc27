pub mod linear_scan_matcher;
