// Copyright 2016 The Cartographer Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Line-of-sight queries against a triangulated city model, and the line-of-sight relation of a
//! road network.

#![allow(renamed_and_removed_lints)]
#![recursion_limit = "1024"]

#[macro_use]
extern crate error_chain;

pub mod building;
pub mod config;
#[allow(deprecated)]
pub mod errors;
pub mod geometry;
pub mod los;
pub mod road;
pub mod scenario;
pub mod spatial_map;
