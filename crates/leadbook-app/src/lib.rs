// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod cache;
pub mod chat;
pub mod console;
pub mod error;
pub mod filter;
pub mod forms;
pub mod ids;
pub mod model;
pub mod selection;
pub mod state;
pub mod store;

pub use cache::*;
pub use chat::*;
pub use console::*;
pub use error::*;
pub use filter::*;
pub use forms::*;
pub use ids::*;
pub use model::*;
pub use selection::*;
pub use state::*;
pub use store::*;
