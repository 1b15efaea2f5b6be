//! Employee model as read from the identity directory.
//!
//! Employees are provisioned by HR outside this crate; the engine only
//! reads them. The reporting-manager reference forms an approval tree that
//! is not guaranteed acyclic, so nothing here walks it recursively.

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fmt;

use leaveledger_shared::types::EmployeeId;

/// Country whose leave policy applies to the employee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Country {
    /// India (monthly CL/PL accrual).
    India,
    /// United States (annual PTO accrual).
    Usa,
}

impl Country {
    /// Returns the string representation of the country.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::India => "INDIA",
            Self::Usa => "USA",
        }
    }

    /// Parses a country from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "INDIA" | "IN" => Some(Self::India),
            "USA" | "US" => Some(Self::Usa),
            _ => None,
        }
    }

    /// Time zone used to decide what "today" means for this country.
    #[must_use]
    pub const fn time_zone(&self) -> Tz {
        match self {
            Self::India => chrono_tz::Asia::Kolkata,
            Self::Usa => chrono_tz::America::New_York,
        }
    }

    /// The local calendar date at `now` in this country.
    #[must_use]
    pub fn today(&self, now: DateTime<Utc>) -> NaiveDate {
        now.with_timezone(&self.time_zone()).date_naive()
    }
}

impl fmt::Display for Country {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Gender as recorded by HR; drives maternity/paternity eligibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Gender {
    /// Male.
    Male,
    /// Female.
    Female,
    /// Other or undisclosed.
    Other,
}

impl Gender {
    /// Parses a gender from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "MALE" | "M" => Some(Self::Male),
            "FEMALE" | "F" => Some(Self::Female),
            "OTHER" => Some(Self::Other),
            _ => None,
        }
    }
}

/// Marital status as recorded by HR.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MaritalStatus {
    /// Single.
    Single,
    /// Married.
    Married,
    /// Divorced.
    Divorced,
    /// Widowed.
    Widowed,
}

impl MaritalStatus {
    /// Parses a marital status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "SINGLE" => Some(Self::Single),
            "MARRIED" => Some(Self::Married),
            "DIVORCED" => Some(Self::Divorced),
            "WIDOWED" => Some(Self::Widowed),
            _ => None,
        }
    }
}

/// Employment status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EmployeeStatus {
    /// Currently employed.
    Active,
    /// Left or suspended; excluded from accrual and approval chains.
    Inactive,
}

impl EmployeeStatus {
    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "ACTIVE" => Some(Self::Active),
            "INACTIVE" => Some(Self::Inactive),
            _ => None,
        }
    }
}

/// Role in the leave workflow.
///
/// Only `Employee` requesters are eligible for auto-approval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Plain employee.
    Employee = 0,
    /// People manager.
    Manager = 1,
    /// HR administrator (approval level 2).
    HrAdmin = 2,
    /// IT administrator (approval level 3).
    ItAdmin = 3,
}

impl Role {
    /// Returns the string representation of the role.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Employee => "EMPLOYEE",
            Self::Manager => "MANAGER",
            Self::HrAdmin => "HR_ADMIN",
            Self::ItAdmin => "IT_ADMIN",
        }
    }

    /// Parses a role from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "EMPLOYEE" => Some(Self::Employee),
            "MANAGER" => Some(Self::Manager),
            "HR_ADMIN" | "HR" => Some(Self::HrAdmin),
            "IT_ADMIN" | "IT" => Some(Self::ItAdmin),
            _ => None,
        }
    }
}

/// Designation ladder, ordered from junior to senior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Designation {
    /// Associate.
    Associate,
    /// Senior associate.
    SeniorAssociate,
    /// Manager.
    Manager,
    /// Senior manager.
    SeniorManager,
    /// Assistant vice president.
    Avp,
    /// Vice president.
    Vp,
    /// Senior vice president.
    Svp,
    /// Executive vice president and above.
    Evp,
}

impl Designation {
    /// Returns the string representation of the designation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Associate => "ASSOCIATE",
            Self::SeniorAssociate => "SENIOR_ASSOCIATE",
            Self::Manager => "MANAGER",
            Self::SeniorManager => "SENIOR_MANAGER",
            Self::Avp => "AVP",
            Self::Vp => "VP",
            Self::Svp => "SVP",
            Self::Evp => "EVP",
        }
    }

    /// Parses a designation from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().replace([' ', '-'], "_").as_str() {
            "ASSOCIATE" => Some(Self::Associate),
            "SENIOR_ASSOCIATE" => Some(Self::SeniorAssociate),
            "MANAGER" => Some(Self::Manager),
            "SENIOR_MANAGER" => Some(Self::SeniorManager),
            "AVP" => Some(Self::Avp),
            "VP" => Some(Self::Vp),
            "SVP" => Some(Self::Svp),
            "EVP" => Some(Self::Evp),
            _ => None,
        }
    }

    /// VP and above get the senior USA PTO rate and carry-forward cap.
    #[must_use]
    pub fn is_vp_or_above(&self) -> bool {
        *self >= Self::Vp
    }
}

/// An employee record from the identity directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    /// Unique identifier.
    pub id: EmployeeId,
    /// Display name.
    pub name: String,
    /// Policy country.
    pub country: Country,
    /// Holiday calendar location (office or state).
    pub location: String,
    /// Designation.
    pub designation: Designation,
    /// First day of employment.
    pub joining_date: NaiveDate,
    /// Gender.
    pub gender: Gender,
    /// Marital status.
    pub marital_status: MaritalStatus,
    /// Employment status.
    pub status: EmployeeStatus,
    /// Workflow role.
    pub role: Role,
    /// Direct reporting manager, if any.
    pub manager_id: Option<EmployeeId>,
}

impl Employee {
    /// Returns true if the employee is active.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == EmployeeStatus::Active
    }

    /// The employee's local date at `now`.
    #[must_use]
    pub fn today(&self, now: DateTime<Utc>) -> NaiveDate {
        self.country.today(now)
    }
}
