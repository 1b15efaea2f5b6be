//! Typed identifiers.
//!
//! Every stored row is keyed by a time-ordered UUID (v7); wrapping each
//! in its own type keeps an `EmployeeId` from being passed where a
//! `LeaveRequestId` is meant, for example as the approver of a level.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! typed_ids {
    ($($(#[$meta:meta])* $name:ident;)+) => {$(
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// A fresh time-ordered id.
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Wraps a stored key.
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// The stored key.
            #[must_use]
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.parse().map(Self)
            }
        }
    )+};
}

typed_ids! {
    /// An employee in the directory.
    EmployeeId;
    /// A leave request.
    LeaveRequestId;
    /// One level of a request's approval chain.
    ApprovalId;
    /// A (employee, leave type, year) ledger record.
    BalanceId;
    /// A weekend or holiday work claim.
    CompOffWorkLogId;
    /// A redeemable comp-off lot created by an approved claim.
    CompOffGrantId;
    /// A recorded ledger invariant violation.
    AnomalyId;
}
