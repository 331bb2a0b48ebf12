mod common;
mod conversion;
