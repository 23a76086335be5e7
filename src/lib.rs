// SPDX-License-Identifier: GPL-3.0-or-later

pub mod batch;
pub mod columns;
pub mod discover;
pub mod error;
pub mod ingest;
pub mod normalize;
pub mod render;
pub mod timestamp;
pub mod util;
