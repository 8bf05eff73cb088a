/*!
Scoring of competition award lists.

This crate turns the lines of award lists (a name, a free-text grade label, a
rank out of a number of participants, in a contest of a given type and year)
into:
- three multiplicative coefficients per result: one for the relative rank, one
  for the contest type and one that makes recent contests weigh more,
- a best guess of the year each contestant entered middle school, obtained by
  weighted voting over the grade labels of all their results.

It also carries the string utilities needed to tell contestants apart: a
longest-common-subsequence matcher and an initials generator aware of the
surnames whose usual romanization is wrong.

The crate performs no I/O. All the tables it needs are passed in already
parsed; see the [manual] for their layout and the [builder] for assembling them.
*/

mod coefficient;
mod config;
mod diagnostics;
mod enrollment;
mod grade;
mod names;
mod rank_table;

pub mod builder;
pub mod manual;

pub use crate::coefficient::*;
pub use crate::config::*;
pub use crate::diagnostics::*;
pub use crate::enrollment::*;
pub use crate::grade::*;
pub use crate::names::*;
pub use crate::rank_table::*;
