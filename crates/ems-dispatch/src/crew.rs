//! Crew composition rules.
//!
//! Which roles a vehicle class needs is a table, not code: [`CREW_RULES`]
//! maps each class to its required role set and a crew is complete when the
//! roles it covers include that set.

use std::collections::BTreeSet;

use ems_core::{Role, Staff, StaffStatus, VehicleClass};

use crate::CrewViolation;

/// Class → roles that must each be covered by at least one member.
pub const CREW_RULES: &[(VehicleClass, &[Role])] = &[
    (VehicleClass::Basic, &[Role::Driver, Role::Nurse]),
    (VehicleClass::Icu,   &[Role::Driver, Role::Nurse, Role::Doctor]),
];

pub fn required_roles(class: VehicleClass) -> &'static [Role] {
    CREW_RULES
        .iter()
        .find(|(c, _)| *c == class)
        .map(|(_, roles)| *roles)
        .unwrap_or(&[])
}

/// First required role (in table order) not covered by `roles`.
pub fn missing_role(class: VehicleClass, roles: impl IntoIterator<Item = Role>) -> Option<Role> {
    let present: BTreeSet<Role> = roles.into_iter().collect();
    required_roles(class).iter().copied().find(|r| !present.contains(r))
}

/// `true` if `members` cover every role `class` requires.
///
/// Only looks at membership; availability is checked when the crew is
/// assembled.
pub fn is_complete(class: VehicleClass, members: &[Staff]) -> bool {
    missing_role(class, members.iter().map(|s| s.role)).is_none()
}

/// A proposed member together with the number of active crews it already
/// belongs to (from the store).
#[derive(Clone, Copy, Debug)]
pub struct CrewCandidate<'a> {
    pub staff:              &'a Staff,
    pub active_memberships: usize,
    /// Already on the roster being edited: only the shift is checked.
    pub retained:           bool,
}

impl<'a> CrewCandidate<'a> {
    /// A member joining a crew.
    pub fn new(staff: &'a Staff, active_memberships: usize) -> Self {
        Self { staff, active_memberships, retained: false }
    }

    /// A member kept from the current roster.
    pub fn retained(staff: &'a Staff) -> Self {
        Self { staff, active_memberships: 0, retained: true }
    }
}

/// Check each member of `candidates` without looking at roles.
///
/// Members are checked in order, each against: repeated id, disabled,
/// unavailable status (`BUSY`, `OFF_SHIFT`, `INACTIVE`), existing active
/// membership, shift.  The first member's shift is the crew's shift.
pub fn validate_members(candidates: &[CrewCandidate<'_>]) -> Result<(), CrewViolation> {
    let Some(first) = candidates.first() else {
        return Err(CrewViolation::Empty);
    };
    let shift = first.staff.shift;
    let mut seen = BTreeSet::new();

    for c in candidates {
        let s = c.staff;
        if !seen.insert(s.id) {
            return Err(CrewViolation::DuplicateMember { staff: s.id, name: s.name.clone() });
        }
        if !c.retained {
            if !s.active {
                return Err(CrewViolation::InactiveStaff { staff: s.id, name: s.name.clone() });
            }
            if s.status != StaffStatus::Available {
                return Err(CrewViolation::UnavailableStaff {
                    staff:  s.id,
                    name:   s.name.clone(),
                    status: s.status,
                });
            }
            if c.active_memberships > 0 {
                return Err(CrewViolation::AlreadyAssigned { staff: s.id, name: s.name.clone() });
            }
        }
        if s.shift != shift {
            return Err(CrewViolation::ShiftMismatch {
                staff:    s.id,
                name:     s.name.clone(),
                expected: shift,
                found:    s.shift,
            });
        }
    }
    Ok(())
}

/// Check that `candidates` may form a crew for a vehicle of `class`.
///
/// Runs [`validate_members`], then checks role coverage once every member
/// has passed.
pub fn validate_crew(class: VehicleClass, candidates: &[CrewCandidate<'_>]) -> Result<(), CrewViolation> {
    validate_members(candidates)?;
    match missing_role(class, candidates.iter().map(|c| c.staff.role)) {
        Some(role) => Err(CrewViolation::MissingRole { class, role }),
        None => Ok(()),
    }
}
