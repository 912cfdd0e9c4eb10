use std::collections::HashMap;

use serde::Serialize;

use crate::{
    analytics::Error,
    repository::{PaymentType, TripRecord},
};

/// Upper bounds of the first three price bins, the last bin runs to the
/// largest total.
pub const PRICE_BREAKS: [f64; 3] = [10.0, 15.0, 20.0];
/// Blocks in a full waffle bar.
pub const WAFFLE_BLOCKS: u32 = 100;

pub const FLOW_NODES: [&str; 7] = [
    "Fare",
    "Extras",
    "Tips",
    "Gross total",
    "Tolls",
    "Surcharge",
    "Net profit",
];

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FlowLink {
    pub source: usize,
    pub target: usize,
    pub value: f64,
}

/// Money flow from what was charged to what is left after deductions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentFlow {
    pub fare: f64,
    pub extra: f64,
    pub tip: f64,
    /// fare + extra + tip
    pub gross: f64,
    pub tolls: f64,
    pub surcharge: f64,
    /// Sum of total amounts minus tolls and surcharges.
    pub profit: f64,
    pub nodes: Vec<&'static str>,
    pub links: Vec<FlowLink>,
}

pub fn payment_flow(trips: &[TripRecord]) -> Result<PaymentFlow, Error> {
    if trips.is_empty() {
        return Err(Error::DataUnavailable("no trips"));
    }
    let sum = |f: fn(&TripRecord) -> Option<f64>| trips.iter().filter_map(f).sum::<f64>();
    let fare = sum(|trip| trip.fare.fare_amount);
    let extra = sum(|trip| trip.fare.extra);
    let tip = sum(|trip| trip.fare.tip_amount);
    let tolls = sum(|trip| trip.fare.tolls_amount);
    let surcharge = sum(|trip| trip.fare.improvement_surcharge);
    let total = sum(|trip| trip.total_amount);

    let gross = fare + extra + tip;
    let profit = total - tolls - surcharge;

    let links = [
        (0, 3, fare),
        (1, 3, extra),
        (2, 3, tip),
        (3, 4, tolls),
        (3, 5, surcharge),
        (3, 6, profit),
    ]
    .into_iter()
    .map(|(source, target, value)| FlowLink {
        source,
        target,
        value,
    })
    .collect();

    Ok(PaymentFlow {
        fare,
        extra,
        tip,
        gross,
        tolls,
        surcharge,
        profit,
        nodes: FLOW_NODES.to_vec(),
        links,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WaffleBlock {
    pub payment_type: PaymentType,
    pub icon: &'static str,
    pub count: u32,
    /// Share of the bin's trips paid this way.
    pub share: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WaffleBar {
    pub label: String,
    pub trips: usize,
    /// Colored blocks, proportional to the fullest bin.
    pub height: u32,
    pub empty: u32,
    /// Colored blocks in stacking order, most used payment first.
    pub blocks: Vec<WaffleBlock>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Waffle {
    pub bars: Vec<WaffleBar>,
    /// Payment types by overall frequency, most frequent first.
    pub order: Vec<PaymentType>,
}

fn price_bin(amount: f64, upper: f64) -> Option<usize> {
    if !(0.0..=upper).contains(&amount) {
        return None;
    }
    Some(
        PRICE_BREAKS
            .iter()
            .position(|limit| amount <= *limit)
            .unwrap_or(PRICE_BREAKS.len()),
    )
}

fn bin_labels(upper: f64) -> [String; 4] {
    let [q1, q2, q3] = PRICE_BREAKS;
    [
        format!("$0.00 - ${q1:.2}"),
        format!("${:.2} - ${q2:.2}", q1 + 0.01),
        format!("${:.2} - ${q3:.2}", q2 + 0.01),
        format!("${:.2} - ${upper:.2}", q3 + 0.01),
    ]
}

/// Splits `height` blocks between shares, flooring each and handing the
/// leftover blocks to the largest remainders. Ties go to the earlier share.
pub fn allocate_blocks(shares: &[f64], height: u32) -> Vec<u32> {
    let exact: Vec<f64> = shares.iter().map(|share| share * height as f64).collect();
    let mut counts: Vec<u32> = exact.iter().map(|value| value.floor() as u32).collect();
    let assigned: u32 = counts.iter().sum();
    let leftover = height.saturating_sub(assigned) as usize;

    let mut by_remainder: Vec<usize> = (0..exact.len()).collect();
    by_remainder.sort_by(|a, b| {
        let rem_a = exact[*a] - exact[*a].floor();
        let rem_b = exact[*b] - exact[*b].floor();
        rem_b.total_cmp(&rem_a)
    });
    by_remainder
        .into_iter()
        .take(leftover)
        .for_each(|index| counts[index] += 1);
    counts
}

/// Payment type mix per price bin, laid out as 100 block bars.
pub fn waffle(trips: &[TripRecord]) -> Result<Waffle, Error> {
    let largest = trips
        .iter()
        .filter_map(|trip| trip.total_amount)
        .fold(f64::NEG_INFINITY, f64::max);
    let upper = largest.max(PRICE_BREAKS[PRICE_BREAKS.len() - 1]);

    let mut overall: HashMap<PaymentType, usize> = HashMap::new();
    let mut bins: [HashMap<PaymentType, usize>; 4] = Default::default();
    trips.iter().for_each(|trip| {
        let payment = trip.payment();
        *overall.entry(payment).or_default() += 1;
        if let Some(bin) = trip.total_amount.and_then(|amount| price_bin(amount, upper)) {
            *bins[bin].entry(payment).or_default() += 1;
        }
    });

    let bin_totals: Vec<usize> = bins.iter().map(|bin| bin.values().sum()).collect();
    let max_total = bin_totals.iter().copied().max().unwrap_or(0);
    if max_total == 0 {
        return Err(Error::DataUnavailable("total_amount"));
    }

    // Columns of the bin x payment table, alphabetical like a pivot
    let mut columns: Vec<PaymentType> = PaymentType::ALL
        .into_iter()
        .filter(|payment| bins.iter().any(|bin| bin.contains_key(payment)))
        .collect();
    columns.sort_by_key(|payment| payment.label());

    let mut order: Vec<PaymentType> = overall.keys().copied().collect();
    order.sort_by(|a, b| overall[b].cmp(&overall[a]).then(a.label().cmp(b.label())));

    let bars = bins
        .iter()
        .zip(bin_totals.iter())
        .zip(bin_labels(upper))
        .map(|((bin, total), label)| {
            let height = (*total as f64 / max_total as f64 * WAFFLE_BLOCKS as f64)
                .round_ties_even() as u32;
            let shares: Vec<f64> = columns
                .iter()
                .map(|payment| {
                    if *total == 0 {
                        0.0
                    } else {
                        bin.get(payment).copied().unwrap_or(0) as f64 / *total as f64
                    }
                })
                .collect();
            let counts = allocate_blocks(&shares, height);
            let blocks = order
                .iter()
                .filter_map(|payment| {
                    let column = columns.iter().position(|value| value == payment)?;
                    (counts[column] > 0).then(|| WaffleBlock {
                        payment_type: *payment,
                        icon: payment.icon(),
                        count: counts[column],
                        share: shares[column],
                    })
                })
                .collect();
            WaffleBar {
                label,
                trips: *total,
                height,
                empty: WAFFLE_BLOCKS - height,
                blocks,
            }
        })
        .collect();

    Ok(Waffle { bars, order })
}

#[test]
fn largest_remainder_fills_height() {
    // 33.3 / 33.3 / 33.3 floors to 99, first share takes the last block
    let counts = allocate_blocks(&[1.0 / 3.0, 1.0 / 3.0, 1.0 / 3.0], 100);
    assert_eq!(counts.iter().sum::<u32>(), 100);
    assert_eq!(counts, vec![34, 33, 33]);
}

#[test]
fn largest_remainder_prefers_biggest_fraction() {
    let counts = allocate_blocks(&[0.125, 0.375, 0.5], 10);
    assert_eq!(counts, vec![1, 4, 5]);
}

#[test]
fn price_bins_include_edges() {
    assert_eq!(price_bin(0.0, 30.0), Some(0));
    assert_eq!(price_bin(10.0, 30.0), Some(0));
    assert_eq!(price_bin(10.5, 30.0), Some(1));
    assert_eq!(price_bin(20.0, 30.0), Some(2));
    assert_eq!(price_bin(30.0, 30.0), Some(3));
    assert_eq!(price_bin(-1.0, 30.0), None);
}
