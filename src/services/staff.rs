use super::Repository;
use crate::clock::Clock;
use crate::db::{Direction, Query};
use crate::models::{Availability, StaffMember, StaffUpdate};
use std::rc::Rc;

const SEARCH_FIELDS: &[&str] = &["firstName", "lastName", "role", "department", "email"];

/// The staff directory.
pub struct StaffService {
    repo: Repository<StaffMember>,
    clock: Rc<dyn Clock>,
}

impl StaffService {
    pub fn new(repo: Repository<StaffMember>, clock: Rc<dyn Clock>) -> Self {
        Self { repo, clock }
    }

    /// Every staff member, in id order.
    pub fn list(&self) -> Vec<StaffMember> {
        self.repo.list()
    }

    /// One staff member, or `None` when the id is unknown.
    pub fn get(&self, id: u64) -> Option<StaffMember> {
        self.repo.get(id)
    }

    /// Adds a staff member with today's join date.
    pub fn create(&mut self, mut member: StaffMember) -> Option<StaffMember> {
        member.join_date = self.clock.today();
        self.repo.create(member)
    }

    /// Merges `update` onto a stored staff member, e.g. a new availability.
    pub fn update(&mut self, id: u64, update: StaffUpdate) -> Option<StaffMember> {
        self.repo.update(id, update)
    }

    pub fn delete(&mut self, id: u64) -> bool {
        self.repo.delete(id)
    }

    /// Staff assigned to the department with this exact name.
    pub fn by_department(&self, department: &str) -> Vec<StaffMember> {
        self.repo.query(
            &Query::all()
                .eq("department", department)
                .sorted_by("lastName", Direction::Ascending),
        )
    }

    /// Case-insensitive substring match on the role, so "nurse" finds
    /// "Head Nurse" too.
    pub fn by_role(&self, role: &str) -> Vec<StaffMember> {
        self.repo.query(&Query::all().contains(&["role"], role.trim()))
    }

    pub fn by_availability(&self, availability: Availability) -> Vec<StaffMember> {
        self.repo
            .query(&Query::all().eq("availabilityStatus", availability.as_str()))
    }

    /// Case-insensitive substring search over name, role, department and email.
    /// A blank query returns everyone.
    pub fn search(&self, text: &str) -> Vec<StaffMember> {
        let text = text.trim();
        if text.is_empty() {
            return self.list();
        }
        self.repo.query(&Query::all().contains(SEARCH_FIELDS, text))
    }
}

#[cfg(test)]
mod tests {
    use crate::models::{Availability, StaffMember};
    use crate::services::testing::services;
    use time::macros::date;

    fn member(first: &str, role: &str, department: &str, availability: Availability) -> StaffMember {
        StaffMember {
            id: 0,
            first_name: first.into(),
            last_name: "Doe".into(),
            role: role.into(),
            department: department.into(),
            specialization: String::new(),
            phone: "555-0200".into(),
            email: format!("{}@wardboard.example", first.to_lowercase()),
            availability_status: availability,
            working_hours: "08:00-16:00".into(),
            join_date: date!(2000 - 01 - 01),
        }
    }

    #[test]
    fn role_and_department_filters() {
        let (mut services, _) = services();
        let staff = &mut services.staff;
        staff.create(member("Grace", "Head Nurse", "Emergency", Availability::Busy));
        staff.create(member("Daniel", "Nurse", "Cardiology", Availability::Available));
        staff.create(member("Sarah", "Doctor", "Emergency", Availability::Available));

        assert_eq!(staff.by_role("nurse").len(), 2);
        assert_eq!(staff.by_department("Emergency").len(), 2);
        assert_eq!(staff.by_availability(Availability::Available).len(), 2);
        assert_eq!(staff.search("cardio")[0].first_name, "Daniel");
        assert_eq!(staff.search("").len(), 3);
    }

    #[test]
    fn create_stamps_join_date() {
        let (mut services, _) = services();
        let created = services
            .staff
            .create(member("Priya", "Doctor", "Neurology", Availability::OnCall))
            .unwrap();
        assert_eq!(created.join_date, date!(2024 - 06 - 03));
    }
}
