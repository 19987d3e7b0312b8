//! Conversions from engine values to wire types.

use api_types::{
    balance::{FriendBalanceView, Overview},
    friend::FriendView,
    loan::{LoanDirection as ApiDirection, LoanStatus as ApiStatus, LoanView},
    repayment::RepaymentView,
};
use chrono::{NaiveDate, Utc};

pub(crate) fn today() -> NaiveDate {
    Utc::now().date_naive()
}

pub(crate) fn map_direction(direction: engine::LoanDirection) -> ApiDirection {
    match direction {
        engine::LoanDirection::Given => ApiDirection::Given,
        engine::LoanDirection::Taken => ApiDirection::Taken,
    }
}

pub(crate) fn parse_direction(direction: ApiDirection) -> engine::LoanDirection {
    match direction {
        ApiDirection::Given => engine::LoanDirection::Given,
        ApiDirection::Taken => engine::LoanDirection::Taken,
    }
}

fn map_status(status: engine::LoanStatus) -> ApiStatus {
    match status {
        engine::LoanStatus::Pending => ApiStatus::Pending,
        engine::LoanStatus::PartiallyPaid => ApiStatus::PartiallyPaid,
        engine::LoanStatus::Paid => ApiStatus::Paid,
    }
}

pub(crate) fn friend_view(friend: engine::Friend) -> FriendView {
    FriendView {
        id: friend.id,
        name: friend.name,
        contact_number: friend.contact_number,
        created_at: friend.created_at,
    }
}

pub(crate) fn repayment_view(repayment: engine::Repayment) -> RepaymentView {
    RepaymentView {
        id: repayment.id,
        amount_minor: repayment.amount.cents(),
        repayment_date: repayment.repayment_date,
        notes: repayment.notes,
        created_at: repayment.created_at,
    }
}

/// The status is derived from the repayments, not read from the stored
/// column.
pub(crate) fn loan_view(detail: engine::LoanDetail, today: NaiveDate) -> LoanView {
    let status = map_status(detail.status());
    let repaid_minor = detail.repaid().cents();
    let remaining_minor = detail.remaining().cents();
    let overdue = detail.is_overdue(today);
    let loan = detail.loan;

    LoanView {
        id: loan.id,
        friend_id: loan.friend_id,
        amount_minor: loan.amount.cents(),
        direction: map_direction(loan.direction),
        status,
        loan_date: loan.loan_date,
        due_date: loan.due_date,
        reason: loan.reason,
        notes: loan.notes,
        repaid_minor,
        remaining_minor,
        overdue,
        repayments: detail.repayments.into_iter().map(repayment_view).collect(),
        created_at: loan.created_at,
        updated_at: loan.updated_at,
    }
}

pub(crate) fn balance_view(balance: engine::FriendBalance) -> FriendBalanceView {
    FriendBalanceView {
        friend_id: balance.friend.id,
        friend_name: balance.friend.name,
        total_given_minor: balance.total_given.cents(),
        total_taken_minor: balance.total_taken.cents(),
        net_balance_minor: balance.net_balance.cents(),
        active_loan_count: balance.active_loan_count,
    }
}

pub(crate) fn overview_view(summary: engine::LoansOverview) -> Overview {
    Overview {
        total_lent_minor: summary.total_lent.cents(),
        total_borrowed_minor: summary.total_borrowed.cents(),
        net_balance_minor: summary.net_balance.cents(),
        active_loan_count: summary.active_loan_count,
        overdue_loan_count: summary.overdue_loan_count,
        friend_count: summary.friend_count,
    }
}
