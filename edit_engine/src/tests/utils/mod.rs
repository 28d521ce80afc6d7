// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

mod env;

pub(crate) use env::{StepClock, TestEnv, VariableResolver};
