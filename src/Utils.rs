//! different utility modules used by the renderers and the command line
/// simplelog set-up: terminal plus optional log file
pub mod log_config;
/// tiny module to save sampled grids into csv files
pub mod logger;
/// parse task documents with structure like " title1 key1: value1, value2 key2: value2 title2 key3:value3, value4"
pub mod task_parser;
#[cfg(test)]
mod task_parser_tests;
/// task sections to render jobs, and writing their results
pub mod task_runner;
