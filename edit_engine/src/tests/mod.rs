// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

mod test_document;
mod test_editing;
mod test_undo;
mod test_views;
mod utils;
