// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Total ordering for enriched projects.
//!
//! Stars descending, then forks descending. Exact ties keep their input
//! order. Unknown counts rank below every known value, including zero, so
//! unresolved repositories collect at the tail.

use std::cmp::Ordering;

use crate::project::EnrichedProject;

/// Compares two projects for ranking purposes.
pub fn compare(left: &EnrichedProject, right: &EnrichedProject,) -> Ordering
{
    right.stars.cmp(&left.stars,).then_with(|| right.forks.cmp(&left.forks,),)
}

/// Sorts projects in place using [`compare`]. The sort is stable.
pub fn rank(projects: &mut [EnrichedProject],)
{
    projects.sort_by(compare,);
}
