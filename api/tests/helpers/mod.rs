#![allow(dead_code, unused_imports)]

pub mod app;
pub mod ws;

pub use app::{NOW, TOKEN, make_test_app, roster, send, test_state};
pub use ws::{connect_ws, next_event, spawn_server};
