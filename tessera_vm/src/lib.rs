// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # Tessera
//!
//! The indexed collection engine of a managed-language runtime: generic
//! `Array` objects with packed and dictionary element storage, `ArrayBuffer`
//! byte storage (resizable, detachable and shared), and the eleven
//! `TypedArray` views over it, together with the full set of Array and
//! TypedArray prototype algorithms.
//!
//! Every algorithm is exposed as a native entry point taking the receiver,
//! an [`ArgumentsList`](ecmascript::builtins::ArgumentsList) and a
//! [`GcScope`](engine::GcScope), returning a
//! [`JsResult`](ecmascript::execution::JsResult).

pub mod ecmascript;
pub mod engine;
pub mod heap;
