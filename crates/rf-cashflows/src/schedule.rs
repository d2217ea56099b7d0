//! A date-ordered container of payments.

use crate::payment::{Payment, PaymentKind};
use rf_time::Date;
use std::collections::BTreeMap;

/// Key used when grouping schedule payments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaymentGrouping {
    /// Group by pay date.
    PayDate,
    /// Group by cutoff date (defaults to the pay date when unset).
    CutoffDate,
    /// Group by accrual end; non-interest payments group under their pay
    /// date.
    AccrualEnd,
}

/// Payments keyed by pay date, ascending. Payments sharing a pay date keep
/// their insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PaymentSchedule {
    by_date: BTreeMap<Date, Vec<Payment>>,
    len: usize,
}

impl PaymentSchedule {
    /// An empty schedule.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a payment, keyed by its pay date.
    pub fn add(&mut self, payment: Payment) {
        self.by_date
            .entry(payment.pay_date())
            .or_default()
            .push(payment);
        self.len += 1;
    }

    /// Add every payment from an iterator.
    pub fn add_all<I: IntoIterator<Item = Payment>>(&mut self, payments: I) {
        for payment in payments {
            self.add(payment);
        }
    }

    /// Remove and return all payments due on a date.
    pub fn remove_on(&mut self, date: Date) -> Vec<Payment> {
        let removed = self.by_date.remove(&date).unwrap_or_default();
        self.len -= removed.len();
        removed
    }

    /// Keep only the payments satisfying the predicate.
    pub fn retain(&mut self, mut keep: impl FnMut(&Payment) -> bool) {
        self.by_date.retain(|_, payments| {
            payments.retain(&mut keep);
            !payments.is_empty()
        });
        self.len = self.by_date.values().map(Vec::len).sum();
    }

    /// The payments due on a date, in insertion order.
    pub fn payments_on(&self, date: Date) -> &[Payment] {
        self.by_date.get(&date).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All payments, ascending by pay date, insertion order within a date.
    pub fn iter(&self) -> impl Iterator<Item = &Payment> {
        self.by_date.values().flatten()
    }

    /// All payments of one kind, in schedule order.
    pub fn payments_of(&self, kind: PaymentKind) -> impl Iterator<Item = &Payment> {
        self.iter().filter(move |p| p.kind() == kind)
    }

    /// Payments due strictly after a date, in schedule order.
    pub fn payments_after(&self, date: Date) -> impl Iterator<Item = &Payment> {
        self.by_date
            .range(date..)
            .filter(move |(d, _)| **d > date)
            .flat_map(|(_, payments)| payments)
    }

    /// Payments due on or after a date, in schedule order.
    pub fn payments_from(&self, date: Date) -> impl Iterator<Item = &Payment> {
        self.by_date.range(date..).flat_map(|(_, payments)| payments)
    }

    /// Group payments by the selected key, ascending by key date.
    pub fn group_by(&self, grouping: PaymentGrouping) -> BTreeMap<Date, Vec<&Payment>> {
        let mut groups: BTreeMap<Date, Vec<&Payment>> = BTreeMap::new();
        for payment in self.iter() {
            let key = match grouping {
                PaymentGrouping::PayDate => payment.pay_date(),
                PaymentGrouping::CutoffDate => payment.cutoff_date(),
                PaymentGrouping::AccrualEnd => payment
                    .interest()
                    .map(|it| it.accrual_end)
                    .unwrap_or_else(|| payment.pay_date()),
            };
            groups.entry(key).or_default().push(payment);
        }
        groups
    }

    /// Earliest pay date, if any.
    pub fn first_date(&self) -> Option<Date> {
        self.by_date.keys().next().copied()
    }

    /// Latest pay date, if any.
    pub fn last_date(&self) -> Option<Date> {
        self.by_date.keys().next_back().copied()
    }

    /// Number of payments.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the schedule holds no payments.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl FromIterator<Payment> for PaymentSchedule {
    fn from_iter<I: IntoIterator<Item = Payment>>(iter: I) -> Self {
        let mut schedule = Self::new();
        schedule.add_all(iter);
        schedule
    }
}

impl<'a> IntoIterator for &'a PaymentSchedule {
    type Item = &'a Payment;
    type IntoIter = std::iter::Flatten<std::collections::btree_map::Values<'a, Date, Vec<Payment>>>;

    fn into_iter(self) -> Self::IntoIter {
        self.by_date.values().flatten()
    }
}
