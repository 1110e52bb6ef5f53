//! Finds which yearly release files exist by probing guessed file names

use std::{collections::BTreeSet, ops::RangeInclusive};

use futures::future::join_all;
use log::{debug, info};

use crate::{
    config::Discovery,
    source::{DataSource, notified_file},
};

pub fn seed_window(current_year: i32, config: &Discovery) -> RangeInclusive<i32> {
    current_year.saturating_sub(span(config.years_back))
        ..=current_year.saturating_add(span(config.years_forward))
}

/// Year offsets past `i32::MAX` are capped there
fn span(years: u32) -> i32 {
    i32::try_from(years).unwrap_or(i32::MAX)
}

/// Years just outside the run of found years, minus the ones already probed
fn expansion_years(found: &BTreeSet<i32>, seed: &RangeInclusive<i32>, expansion: u32) -> Vec<i32> {
    let (Some(&min), Some(&max)) = (found.first(), found.last()) else {
        return vec![];
    };
    let expansion = span(expansion);

    (min.saturating_sub(expansion)..min)
        .chain(max.saturating_add(1)..=max.saturating_add(expansion))
        .filter(|year| !seed.contains(year))
        .collect()
}

/// Returns the years that have a release file, most recent first.
///
/// Probes run in two sequential phases, each fully concurrent: the seed window
/// around `current_year`, then `expansion` years beyond the lowest and highest
/// hit. Without any hit in the seed window nothing else is probed.
/// Never fails: a probe that errors counts as "no file".
pub async fn discover_years(
    source: &dyn DataSource,
    current_year: i32,
    config: &Discovery,
) -> Vec<i32> {
    let seed = seed_window(current_year, config);
    let mut found: BTreeSet<i32> = probe_all(source, seed.clone()).await;

    let extra = expansion_years(&found, &seed, config.expansion);
    if !extra.is_empty() {
        found.extend(probe_all(source, extra).await);
    }

    info!("Found release files for {} year(s)", found.len());
    found.into_iter().rev().collect()
}

async fn probe_all(source: &dyn DataSource, years: impl IntoIterator<Item = i32>) -> BTreeSet<i32> {
    join_all(years.into_iter().map(|year| probe(source, year)))
        .await
        .into_iter()
        .flatten()
        .collect()
}

async fn probe(source: &dyn DataSource, year: i32) -> Option<i32> {
    match source.exists(&notified_file(year)).await {
        Ok(true) => Some(year),
        Ok(false) => None,
        Err(e) => {
            debug!("probe for {year} failed, treating as absent: {e}");
            None
        }
    }
}
