// src/candidates/tests/mod.rs

mod pipeline_tests;
