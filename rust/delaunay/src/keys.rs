// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Arena key types for beach-line entities.
//!
//! Arcs and breakpoints live in per-sweep slot maps and reference each
//! other through these generational keys instead of pointers. A key held
//! by a stale circle event simply fails to resolve once the arc is gone.

use slotmap::new_key_type;

new_key_type! {
    /// Key for a parabolic arc on the beach line.
    pub struct ArcKey;

    /// Key for a breakpoint between two adjacent arcs.
    pub struct BreakKey;
}
