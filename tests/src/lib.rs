#![cfg(test)]

mod pipeline;
mod store;
mod support;
