/// Data organization utilities for the marine weather dashboard.
///
/// This module provides the grouping and selection helpers the views use
/// to turn one flat observation batch into what they display.
///
/// Submodules:
/// - `groupings`: latest record per station, station/date filters, table paging.

pub mod groupings;
