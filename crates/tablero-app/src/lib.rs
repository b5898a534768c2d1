// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod catalog;
pub mod engine;
pub mod history;
pub mod ids;
pub mod model;

pub use engine::*;
pub use history::*;
pub use ids::*;
pub use model::*;
