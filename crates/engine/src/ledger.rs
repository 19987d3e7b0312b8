//! Pure ledger math.
//!
//! Everything here works on an immutable snapshot of loans and their
//! repayments: loan status is a reducer over `(amount, repayments)` and the
//! per-friend balances are an explicit aggregation pass. Nothing is cached
//! between calls.

use std::collections::HashMap;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
    EngineError, Friend, Loan, LoanDirection, LoanStatus, MoneyCents, Repayment, ResultEngine,
};

/// Derive a loan status from its principal and the sum of its repayments.
///
/// Over-payment is not an error: anything at or above the principal is
/// `Paid`.
pub fn derive_status(amount: MoneyCents, repaid: MoneyCents) -> LoanStatus {
    if repaid >= amount {
        LoanStatus::Paid
    } else if repaid.is_positive() {
        LoanStatus::PartiallyPaid
    } else {
        LoanStatus::Pending
    }
}

/// Sum of the repayments, clamped at `i64::MAX`.
///
/// A clamped total is still at or above any principal, so the derived status
/// stays `Paid`.
pub fn total_repaid(repayments: &[Repayment]) -> MoneyCents {
    repayments
        .iter()
        .fold(MoneyCents::ZERO, |acc, r| acc.saturating_add(r.amount))
}

fn out_of_range() -> EngineError {
    EngineError::InvalidAmount("balance out of range".to_string())
}

fn add_checked(acc: MoneyCents, amount: MoneyCents) -> ResultEngine<MoneyCents> {
    acc.checked_add(amount).ok_or_else(out_of_range)
}

/// A loan together with every repayment recorded against it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoanDetail {
    pub loan: Loan,
    pub repayments: Vec<Repayment>,
}

impl LoanDetail {
    pub fn new(loan: Loan, repayments: Vec<Repayment>) -> Self {
        Self { loan, repayments }
    }

    pub fn repaid(&self) -> MoneyCents {
        total_repaid(&self.repayments)
    }

    /// Status derived from the repayments, ignoring the persisted value.
    pub fn status(&self) -> LoanStatus {
        derive_status(self.loan.amount, self.repaid())
    }

    /// `amount - repaid`; negative when over-paid.
    pub fn remaining(&self) -> MoneyCents {
        self.loan.amount.saturating_sub(self.repaid())
    }

    /// Amount still owed; paid loans contribute nothing.
    pub fn outstanding(&self) -> MoneyCents {
        if self.status().is_active() {
            self.remaining()
        } else {
            MoneyCents::ZERO
        }
    }

    /// `true` when the due date is strictly before `today` and the loan is
    /// not paid.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.status().is_active() && self.loan.due_date.is_some_and(|due| due < today)
    }

    /// `true` when the persisted status disagrees with the derived one.
    pub fn is_stale(&self) -> bool {
        self.loan.status != self.status()
    }
}

/// Net position with a single friend.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FriendBalance {
    pub friend: Friend,
    /// Outstanding on loans the user gave.
    pub total_given: MoneyCents,
    /// Outstanding on loans the user took.
    pub total_taken: MoneyCents,
    /// `total_given - total_taken`: positive means the friend owes the user.
    pub net_balance: MoneyCents,
    pub active_loan_count: usize,
}

impl FriendBalance {
    pub fn empty(friend: Friend) -> Self {
        Self {
            friend,
            total_given: MoneyCents::ZERO,
            total_taken: MoneyCents::ZERO,
            net_balance: MoneyCents::ZERO,
            active_loan_count: 0,
        }
    }

    fn accumulate(&mut self, detail: &LoanDetail) -> ResultEngine<()> {
        let status = detail.status();
        if status.is_active() {
            match detail.loan.direction {
                LoanDirection::Given => {
                    self.total_given = add_checked(self.total_given, detail.remaining())?;
                }
                LoanDirection::Taken => {
                    self.total_taken = add_checked(self.total_taken, detail.remaining())?;
                }
            }
            self.active_loan_count += 1;
        }
        self.net_balance = self
            .total_given
            .checked_sub(self.total_taken)
            .ok_or_else(out_of_range)?;
        Ok(())
    }
}

/// Aggregate `loans` into one balance per friend.
///
/// The result follows the order of `friends` and contains every friend, even
/// the ones without loans. Loans pointing at a friend not in `friends` are
/// ignored. Totals that do not fit in an `i64` are an
/// [`EngineError::InvalidAmount`].
pub fn friend_balances(
    friends: &[Friend],
    loans: &[LoanDetail],
) -> ResultEngine<Vec<FriendBalance>> {
    let mut balances: Vec<FriendBalance> =
        friends.iter().cloned().map(FriendBalance::empty).collect();
    let index: HashMap<Uuid, usize> = friends
        .iter()
        .enumerate()
        .map(|(pos, friend)| (friend.id, pos))
        .collect();

    for detail in loans {
        if let Some(&pos) = index.get(&detail.loan.friend_id) {
            balances[pos].accumulate(detail)?;
        }
    }

    Ok(balances)
}

/// Balance for a single friend, looking only at that friend's loans.
pub fn friend_balance(friend: Friend, loans: &[LoanDetail]) -> ResultEngine<FriendBalance> {
    let friend_id = friend.id;
    let mut balance = FriendBalance::empty(friend);
    for detail in loans.iter().filter(|d| d.loan.friend_id == friend_id) {
        balance.accumulate(detail)?;
    }
    Ok(balance)
}

/// Totals across every loan of a user.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LoansOverview {
    /// Outstanding on given loans.
    pub total_lent: MoneyCents,
    /// Outstanding on taken loans.
    pub total_borrowed: MoneyCents,
    pub net_balance: MoneyCents,
    pub active_loan_count: usize,
    pub overdue_loan_count: usize,
    /// Friends with at least one active loan.
    pub friend_count: usize,
}

pub fn overview(loans: &[LoanDetail], today: NaiveDate) -> ResultEngine<LoansOverview> {
    let mut summary = LoansOverview::default();
    let mut friends: Vec<Uuid> = Vec::new();

    for detail in loans.iter().filter(|d| d.status().is_active()) {
        match detail.loan.direction {
            LoanDirection::Given => {
                summary.total_lent = add_checked(summary.total_lent, detail.remaining())?;
            }
            LoanDirection::Taken => {
                summary.total_borrowed = add_checked(summary.total_borrowed, detail.remaining())?;
            }
        }
        summary.active_loan_count += 1;
        if detail.is_overdue(today) {
            summary.overdue_loan_count += 1;
        }
        if !friends.contains(&detail.loan.friend_id) {
            friends.push(detail.loan.friend_id);
        }
    }

    summary.net_balance = summary
        .total_lent
        .checked_sub(summary.total_borrowed)
        .ok_or_else(out_of_range)?;
    summary.friend_count = friends.len();
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 5, d).unwrap()
    }

    fn friend(name: &str) -> Friend {
        Friend::new("alice".to_string(), name.to_string(), None)
    }

    fn loan(friend: &Friend, amount: i64, direction: LoanDirection) -> Loan {
        Loan::new(
            "alice".to_string(),
            friend.id,
            MoneyCents::new(amount),
            direction,
            date(1),
            None,
            None,
            None,
        )
        .unwrap()
    }

    fn repayment(loan: &Loan, amount: i64) -> Repayment {
        Repayment::new(loan.id, MoneyCents::new(amount), date(2), None).unwrap()
    }

    #[test]
    fn status_follows_repaid_total() {
        let amount = MoneyCents::new(100);
        assert_eq!(derive_status(amount, MoneyCents::ZERO), LoanStatus::Pending);
        assert_eq!(derive_status(amount, MoneyCents::new(1)), LoanStatus::PartiallyPaid);
        assert_eq!(derive_status(amount, MoneyCents::new(99)), LoanStatus::PartiallyPaid);
        assert_eq!(derive_status(amount, MoneyCents::new(100)), LoanStatus::Paid);
        assert_eq!(derive_status(amount, MoneyCents::new(150)), LoanStatus::Paid);
    }

    #[test]
    fn friend_without_loans_has_zero_balance() {
        let bob = friend("Bob");
        let balances = friend_balances(std::slice::from_ref(&bob), &[]).unwrap();

        assert_eq!(balances, vec![FriendBalance::empty(bob)]);
        assert_eq!(balances[0].net_balance, MoneyCents::ZERO);
        assert_eq!(balances[0].active_loan_count, 0);
    }

    #[test]
    fn repayments_reduce_outstanding_until_paid() {
        let bob = friend("Bob");
        let given = loan(&bob, 100, LoanDirection::Given);

        let mut detail = LoanDetail::new(given.clone(), Vec::new());
        let balance = friend_balance(bob.clone(), std::slice::from_ref(&detail)).unwrap();
        assert_eq!(balance.total_given, MoneyCents::new(100));
        assert_eq!(balance.total_taken, MoneyCents::ZERO);
        assert_eq!(balance.net_balance, MoneyCents::new(100));
        assert_eq!(balance.active_loan_count, 1);

        detail.repayments.push(repayment(&given, 60));
        assert_eq!(detail.status(), LoanStatus::PartiallyPaid);
        let balance = friend_balance(bob.clone(), std::slice::from_ref(&detail)).unwrap();
        assert_eq!(balance.total_given, MoneyCents::new(40));

        detail.repayments.push(repayment(&given, 40));
        assert_eq!(detail.status(), LoanStatus::Paid);
        let balance = friend_balance(bob, std::slice::from_ref(&detail)).unwrap();
        assert_eq!(balance.total_given, MoneyCents::ZERO);
        assert_eq!(balance.active_loan_count, 0);
    }

    #[test]
    fn over_payment_is_paid_and_contributes_nothing() {
        let bob = friend("Bob");
        let given = loan(&bob, 100, LoanDirection::Given);
        let detail = LoanDetail::new(
            given.clone(),
            vec![repayment(&given, 100), repayment(&given, 50)],
        );

        assert_eq!(detail.status(), LoanStatus::Paid);
        assert_eq!(detail.remaining(), MoneyCents::new(-50));
        assert_eq!(detail.outstanding(), MoneyCents::ZERO);
        let balance = friend_balance(bob, std::slice::from_ref(&detail)).unwrap();
        assert_eq!(balance.net_balance, MoneyCents::ZERO);
    }

    #[test]
    fn net_balance_nets_given_against_taken() {
        let bob = friend("Bob");
        let carol = friend("Carol");
        let given = loan(&bob, 100, LoanDirection::Given);
        let taken = loan(&bob, 250, LoanDirection::Taken);
        let carol_loan = loan(&carol, 30, LoanDirection::Given);
        let loans = vec![
            LoanDetail::new(given.clone(), vec![repayment(&given, 20)]),
            LoanDetail::new(taken, Vec::new()),
            LoanDetail::new(carol_loan, Vec::new()),
        ];

        let balances = friend_balances(&[bob.clone(), carol.clone()], &loans).unwrap();
        assert_eq!(balances[0].friend, bob);
        assert_eq!(balances[0].total_given, MoneyCents::new(80));
        assert_eq!(balances[0].total_taken, MoneyCents::new(250));
        assert_eq!(balances[0].net_balance, MoneyCents::new(-170));
        assert_eq!(balances[0].active_loan_count, 2);
        assert_eq!(balances[1].friend, carol);
        assert_eq!(balances[1].net_balance, MoneyCents::new(30));
    }

    #[test]
    fn aggregation_ignores_stale_persisted_status() {
        let bob = friend("Bob");
        let mut given = loan(&bob, 100, LoanDirection::Given);
        given.status = LoanStatus::Paid;
        let detail = LoanDetail::new(given, Vec::new());

        assert!(detail.is_stale());
        let balance = friend_balance(bob, std::slice::from_ref(&detail)).unwrap();
        assert_eq!(balance.total_given, MoneyCents::new(100));
    }

    #[test]
    fn overdue_requires_past_due_date_and_open_loan() {
        let bob = friend("Bob");
        let mut given = loan(&bob, 100, LoanDirection::Given);
        given.due_date = Some(date(10));
        let mut detail = LoanDetail::new(given.clone(), Vec::new());

        assert!(!detail.is_overdue(date(10)));
        assert!(detail.is_overdue(date(11)));

        detail.repayments.push(repayment(&given, 100));
        assert!(!detail.is_overdue(date(11)));
    }

    #[test]
    fn overview_sums_open_loans_across_friends() {
        let bob = friend("Bob");
        let carol = friend("Carol");
        let mut lent = loan(&bob, 100, LoanDirection::Given);
        lent.due_date = Some(date(3));
        let borrowed = loan(&carol, 40, LoanDirection::Taken);
        let closed = loan(&carol, 10, LoanDirection::Given);
        let loans = vec![
            LoanDetail::new(lent, Vec::new()),
            LoanDetail::new(borrowed, Vec::new()),
            LoanDetail::new(closed.clone(), vec![repayment(&closed, 10)]),
        ];

        let summary = overview(&loans, date(4)).unwrap();
        assert_eq!(summary.total_lent, MoneyCents::new(100));
        assert_eq!(summary.total_borrowed, MoneyCents::new(40));
        assert_eq!(summary.net_balance, MoneyCents::new(60));
        assert_eq!(summary.active_loan_count, 2);
        assert_eq!(summary.overdue_loan_count, 1);
        assert_eq!(summary.friend_count, 2);
    }

    #[test]
    fn totals_out_of_range_are_an_error_not_a_wrap() {
        let bob = friend("Bob");
        let mut first = loan(&bob, 100, LoanDirection::Given);
        first.amount = MoneyCents::new(i64::MAX);
        let mut second = loan(&bob, 100, LoanDirection::Given);
        second.amount = MoneyCents::new(i64::MAX);
        let loans = vec![
            LoanDetail::new(first, Vec::new()),
            LoanDetail::new(second, Vec::new()),
        ];

        let expected = || EngineError::InvalidAmount("balance out of range".to_string());
        assert_eq!(
            friend_balances(std::slice::from_ref(&bob), &loans),
            Err(expected())
        );
        assert_eq!(friend_balance(bob, &loans), Err(expected()));
        assert_eq!(overview(&loans, date(4)), Err(expected()));
    }

    #[test]
    fn huge_repayment_totals_clamp_to_paid() {
        let bob = friend("Bob");
        let given = loan(&bob, 100, LoanDirection::Given);
        let mut first = repayment(&given, 1);
        first.amount = MoneyCents::new(i64::MAX);
        let mut second = repayment(&given, 1);
        second.amount = MoneyCents::new(i64::MAX);
        let detail = LoanDetail::new(given, vec![first, second]);

        assert_eq!(detail.repaid(), MoneyCents::new(i64::MAX));
        assert_eq!(detail.status(), LoanStatus::Paid);
        assert_eq!(detail.remaining(), MoneyCents::new(100 - i64::MAX));
        assert_eq!(detail.outstanding(), MoneyCents::ZERO);
    }
}
