// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Natural ordering for topic names.
//!
//! Topic names embed counters (`/camera1`, `/camera10`), so plain
//! lexicographic comparison interleaves them badly. Natural comparison
//! treats each maximal digit run as one number: `/camera2 < /camera10`.

use std::cmp::Ordering;

/// Compare two strings naturally: digit runs compare numerically, other
/// segments compare byte-wise.
///
/// Longer digit runs with equal numeric value (leading zeros) fall back to
/// run length so the ordering stays total and antisymmetric.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut ia = a.as_bytes();
    let mut ib = b.as_bytes();

    loop {
        match (ia.first(), ib.first()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(&ca), Some(&cb)) => {
                if ca.is_ascii_digit() && cb.is_ascii_digit() {
                    let (run_a, rest_a) = split_digit_run(ia);
                    let (run_b, rest_b) = split_digit_run(ib);
                    let ord = cmp_digit_runs(run_a, run_b);
                    if ord != Ordering::Equal {
                        return ord;
                    }
                    ia = rest_a;
                    ib = rest_b;
                } else {
                    let ord = ca.cmp(&cb);
                    if ord != Ordering::Equal {
                        return ord;
                    }
                    ia = &ia[1..];
                    ib = &ib[1..];
                }
            }
        }
    }
}

fn split_digit_run(bytes: &[u8]) -> (&[u8], &[u8]) {
    let end = bytes
        .iter()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(bytes.len());
    bytes.split_at(end)
}

/// Compare two ASCII digit runs numerically without parsing into integers,
/// so arbitrarily long runs cannot overflow.
fn cmp_digit_runs(a: &[u8], b: &[u8]) -> Ordering {
    let a_trim = trim_leading_zeros(a);
    let b_trim = trim_leading_zeros(b);
    a_trim
        .len()
        .cmp(&b_trim.len())
        .then_with(|| a_trim.cmp(b_trim))
        .then_with(|| a.len().cmp(&b.len()))
}

fn trim_leading_zeros(run: &[u8]) -> &[u8] {
    let start = run.iter().position(|&b| b != b'0').unwrap_or(run.len());
    &run[start..]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_strings_compare_bytewise() {
        assert_eq!(natural_cmp("/imu", "/imu"), Ordering::Equal);
        assert_eq!(natural_cmp("/camera", "/imu"), Ordering::Less);
    }

    #[test]
    fn test_digit_runs_compare_numerically() {
        assert_eq!(natural_cmp("/camera2", "/camera10"), Ordering::Less);
        assert_eq!(natural_cmp("topic_a1", "topic_a2"), Ordering::Less);
        assert_eq!(natural_cmp("topic_a2", "topic_a10"), Ordering::Less);
        assert_eq!(natural_cmp("topic_a10", "topic_a1"), Ordering::Greater);
    }

    #[test]
    fn test_prefix_orders_before_extension() {
        assert_eq!(natural_cmp("/cam", "/cam1"), Ordering::Less);
    }

    #[test]
    fn test_leading_zeros_break_numeric_ties() {
        assert_eq!(natural_cmp("a01", "a1"), Ordering::Greater);
        assert_eq!(natural_cmp("a01", "a01"), Ordering::Equal);
        assert_eq!(natural_cmp("a01", "a2"), Ordering::Less);
    }

    #[test]
    fn test_long_digit_runs_do_not_overflow() {
        let small = "t99999999999999999999";
        let big = "t100000000000000000000";
        assert_eq!(natural_cmp(small, big), Ordering::Less);
    }

    #[test]
    fn test_sorted_topic_list() {
        let mut topics = vec!["/tf10", "/tf2", "/tf1", "/odom"];
        topics.sort_by(|a, b| natural_cmp(a, b));
        assert_eq!(topics, vec!["/odom", "/tf1", "/tf2", "/tf10"]);
    }
}
