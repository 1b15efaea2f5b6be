//! String-backed enums shared by several tables.
//!
//! Each mirrors a core domain enum; the `From` impls are the only place the
//! two vocabularies meet.

use leaveledger_core::accrual::AccrualStatus as CoreAccrualStatus;
use leaveledger_core::carry_forward::CarryForwardStatus as CoreCarryForwardStatus;
use leaveledger_core::comp_off::GrantStatus as CoreGrantStatus;
use leaveledger_core::leave::{HalfDaySession as CoreHalfDaySession, LeaveType};
use leaveledger_core::ledger::MovementKind as CoreMovementKind;
use leaveledger_core::workflow::{
    ApprovalStatus as CoreApprovalStatus, ApproverRole as CoreApproverRole,
    RequestStatus as CoreRequestStatus,
};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(8))")]
pub enum LeaveTypeCode {
    #[sea_orm(string_value = "CL")]
    Casual,
    #[sea_orm(string_value = "PL")]
    Privilege,
    #[sea_orm(string_value = "SL")]
    Sick,
    #[sea_orm(string_value = "ML")]
    Maternity,
    #[sea_orm(string_value = "PTL")]
    Paternity,
    #[sea_orm(string_value = "BL")]
    Bereavement,
    #[sea_orm(string_value = "MRL")]
    Marriage,
    #[sea_orm(string_value = "CO")]
    CompOff,
    #[sea_orm(string_value = "LWP")]
    LeaveWithoutPay,
    #[sea_orm(string_value = "PTO")]
    Pto,
}

impl From<LeaveType> for LeaveTypeCode {
    fn from(value: LeaveType) -> Self {
        match value {
            LeaveType::Casual => Self::Casual,
            LeaveType::Privilege => Self::Privilege,
            LeaveType::Sick => Self::Sick,
            LeaveType::Maternity => Self::Maternity,
            LeaveType::Paternity => Self::Paternity,
            LeaveType::Bereavement => Self::Bereavement,
            LeaveType::Marriage => Self::Marriage,
            LeaveType::CompOff => Self::CompOff,
            LeaveType::LeaveWithoutPay => Self::LeaveWithoutPay,
            LeaveType::Pto => Self::Pto,
        }
    }
}

impl From<LeaveTypeCode> for LeaveType {
    fn from(value: LeaveTypeCode) -> Self {
        match value {
            LeaveTypeCode::Casual => Self::Casual,
            LeaveTypeCode::Privilege => Self::Privilege,
            LeaveTypeCode::Sick => Self::Sick,
            LeaveTypeCode::Maternity => Self::Maternity,
            LeaveTypeCode::Paternity => Self::Paternity,
            LeaveTypeCode::Bereavement => Self::Bereavement,
            LeaveTypeCode::Marriage => Self::Marriage,
            LeaveTypeCode::CompOff => Self::CompOff,
            LeaveTypeCode::LeaveWithoutPay => Self::LeaveWithoutPay,
            LeaveTypeCode::Pto => Self::Pto,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum RequestStatus {
    #[sea_orm(string_value = "PENDING")]
    Pending,
    #[sea_orm(string_value = "APPROVED")]
    Approved,
    #[sea_orm(string_value = "REJECTED")]
    Rejected,
    #[sea_orm(string_value = "CANCELLED")]
    Cancelled,
}

impl From<CoreRequestStatus> for RequestStatus {
    fn from(value: CoreRequestStatus) -> Self {
        match value {
            CoreRequestStatus::Pending => Self::Pending,
            CoreRequestStatus::Approved => Self::Approved,
            CoreRequestStatus::Rejected => Self::Rejected,
            CoreRequestStatus::Cancelled => Self::Cancelled,
        }
    }
}

impl From<RequestStatus> for CoreRequestStatus {
    fn from(value: RequestStatus) -> Self {
        match value {
            RequestStatus::Pending => Self::Pending,
            RequestStatus::Approved => Self::Approved,
            RequestStatus::Rejected => Self::Rejected,
            RequestStatus::Cancelled => Self::Cancelled,
        }
    }
}

/// Status of one approval level, also used for comp-off work logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum ApprovalStatus {
    #[sea_orm(string_value = "PENDING")]
    Pending,
    #[sea_orm(string_value = "APPROVED")]
    Approved,
    #[sea_orm(string_value = "REJECTED")]
    Rejected,
}

impl From<CoreApprovalStatus> for ApprovalStatus {
    fn from(value: CoreApprovalStatus) -> Self {
        match value {
            CoreApprovalStatus::Pending => Self::Pending,
            CoreApprovalStatus::Approved => Self::Approved,
            CoreApprovalStatus::Rejected => Self::Rejected,
        }
    }
}

impl From<ApprovalStatus> for CoreApprovalStatus {
    fn from(value: ApprovalStatus) -> Self {
        match value {
            ApprovalStatus::Pending => Self::Pending,
            ApprovalStatus::Approved => Self::Approved,
            ApprovalStatus::Rejected => Self::Rejected,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum ApproverRole {
    #[sea_orm(string_value = "MANAGER")]
    Manager,
    #[sea_orm(string_value = "HR_ADMIN")]
    HrAdmin,
    #[sea_orm(string_value = "IT_ADMIN")]
    ItAdmin,
}

impl From<CoreApproverRole> for ApproverRole {
    fn from(value: CoreApproverRole) -> Self {
        match value {
            CoreApproverRole::Manager => Self::Manager,
            CoreApproverRole::HrAdmin => Self::HrAdmin,
            CoreApproverRole::ItAdmin => Self::ItAdmin,
        }
    }
}

impl From<ApproverRole> for CoreApproverRole {
    fn from(value: ApproverRole) -> Self {
        match value {
            ApproverRole::Manager => Self::Manager,
            ApproverRole::HrAdmin => Self::HrAdmin,
            ApproverRole::ItAdmin => Self::ItAdmin,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum HalfDaySession {
    #[sea_orm(string_value = "FIRST_HALF")]
    FirstHalf,
    #[sea_orm(string_value = "SECOND_HALF")]
    SecondHalf,
}

impl From<CoreHalfDaySession> for HalfDaySession {
    fn from(value: CoreHalfDaySession) -> Self {
        match value {
            CoreHalfDaySession::FirstHalf => Self::FirstHalf,
            CoreHalfDaySession::SecondHalf => Self::SecondHalf,
        }
    }
}

impl From<HalfDaySession> for CoreHalfDaySession {
    fn from(value: HalfDaySession) -> Self {
        match value {
            HalfDaySession::FirstHalf => Self::FirstHalf,
            HalfDaySession::SecondHalf => Self::SecondHalf,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum MovementKind {
    #[sea_orm(string_value = "CREDIT")]
    Credit,
    #[sea_orm(string_value = "DEBIT")]
    Debit,
    #[sea_orm(string_value = "REVERSAL")]
    Reversal,
    #[sea_orm(string_value = "CARRY_IN")]
    CarryIn,
    #[sea_orm(string_value = "CLOSE_OUT")]
    CloseOut,
    #[sea_orm(string_value = "EXPIRY")]
    Expiry,
    #[sea_orm(string_value = "ADJUSTMENT")]
    Adjustment,
}

impl From<CoreMovementKind> for MovementKind {
    fn from(value: CoreMovementKind) -> Self {
        match value {
            CoreMovementKind::Credit => Self::Credit,
            CoreMovementKind::Debit => Self::Debit,
            CoreMovementKind::Reversal => Self::Reversal,
            CoreMovementKind::CarryIn => Self::CarryIn,
            CoreMovementKind::CloseOut => Self::CloseOut,
            CoreMovementKind::Expiry => Self::Expiry,
            CoreMovementKind::Adjustment => Self::Adjustment,
        }
    }
}

impl From<MovementKind> for CoreMovementKind {
    fn from(value: MovementKind) -> Self {
        match value {
            MovementKind::Credit => Self::Credit,
            MovementKind::Debit => Self::Debit,
            MovementKind::Reversal => Self::Reversal,
            MovementKind::CarryIn => Self::CarryIn,
            MovementKind::CloseOut => Self::CloseOut,
            MovementKind::Expiry => Self::Expiry,
            MovementKind::Adjustment => Self::Adjustment,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(24))")]
pub enum AccrualStatus {
    #[sea_orm(string_value = "PROCESSED")]
    Processed,
    #[sea_orm(string_value = "SKIPPED_MATERNITY")]
    SkippedMaternity,
}

impl From<CoreAccrualStatus> for AccrualStatus {
    fn from(value: CoreAccrualStatus) -> Self {
        match value {
            CoreAccrualStatus::Processed => Self::Processed,
            CoreAccrualStatus::SkippedMaternity => Self::SkippedMaternity,
        }
    }
}

impl From<AccrualStatus> for CoreAccrualStatus {
    fn from(value: AccrualStatus) -> Self {
        match value {
            AccrualStatus::Processed => Self::Processed,
            AccrualStatus::SkippedMaternity => Self::SkippedMaternity,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum CarryForwardStatus {
    #[sea_orm(string_value = "CARRIED")]
    Carried,
    #[sea_orm(string_value = "LAPSED")]
    Lapsed,
    #[sea_orm(string_value = "EXPIRED")]
    Expired,
}

impl From<CoreCarryForwardStatus> for CarryForwardStatus {
    fn from(value: CoreCarryForwardStatus) -> Self {
        match value {
            CoreCarryForwardStatus::Carried => Self::Carried,
            CoreCarryForwardStatus::Lapsed => Self::Lapsed,
            CoreCarryForwardStatus::Expired => Self::Expired,
        }
    }
}

impl From<CarryForwardStatus> for CoreCarryForwardStatus {
    fn from(value: CarryForwardStatus) -> Self {
        match value {
            CarryForwardStatus::Carried => Self::Carried,
            CarryForwardStatus::Lapsed => Self::Lapsed,
            CarryForwardStatus::Expired => Self::Expired,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum GrantStatus {
    #[sea_orm(string_value = "ACTIVE")]
    Active,
    #[sea_orm(string_value = "EXHAUSTED")]
    Exhausted,
    #[sea_orm(string_value = "EXPIRED")]
    Expired,
}

impl From<CoreGrantStatus> for GrantStatus {
    fn from(value: CoreGrantStatus) -> Self {
        match value {
            CoreGrantStatus::Active => Self::Active,
            CoreGrantStatus::Exhausted => Self::Exhausted,
            CoreGrantStatus::Expired => Self::Expired,
        }
    }
}

impl From<GrantStatus> for CoreGrantStatus {
    fn from(value: GrantStatus) -> Self {
        match value {
            GrantStatus::Active => Self::Active,
            GrantStatus::Exhausted => Self::Exhausted,
            GrantStatus::Expired => Self::Expired,
        }
    }
}
