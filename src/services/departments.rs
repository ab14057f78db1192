use super::Repository;
use crate::db::{Direction, Query};
use crate::models::{Department, DepartmentUpdate};

/// Departments and their bed counts.
pub struct DepartmentService {
    repo: Repository<Department>,
}

impl DepartmentService {
    pub fn new(repo: Repository<Department>) -> Self {
        Self { repo }
    }

    /// Every department, sorted by name.
    pub fn list(&self) -> Vec<Department> {
        self.repo
            .query(&Query::all().sorted_by("name", Direction::Ascending))
    }

    pub fn get(&self, id: u64) -> Option<Department> {
        self.repo.get(id)
    }

    /// Adds a department and returns it with its assigned id.
    pub fn create(&mut self, department: Department) -> Option<Department> {
        self.repo.create(department)
    }

    /// Merges `update` onto a stored department, e.g. a new occupied-bed count.
    pub fn update(&mut self, id: u64, update: DepartmentUpdate) -> Option<Department> {
        self.repo.update(id, update)
    }

    pub fn delete(&mut self, id: u64) -> bool {
        self.repo.delete(id)
    }

    /// Case-insensitive substring search over name and head of department.
    pub fn search(&self, text: &str) -> Vec<Department> {
        let text = text.trim();
        if text.is_empty() {
            return self.list();
        }
        self.repo.query(
            &Query::all()
                .contains(&["name", "headOfDepartment"], text)
                .sorted_by("name", Direction::Ascending),
        )
    }

    /// Departments with at least one unoccupied bed.
    pub fn with_free_beds(&self) -> Vec<Department> {
        self.list()
            .into_iter()
            .filter(|d| d.available_beds() > 0)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use crate::models::{Change, Department, DepartmentUpdate, OccupancyLevel};
    use crate::services::testing::services;

    fn department(name: &str, total: u32, occupied: u32) -> Department {
        Department {
            id: 0,
            name: name.into(),
            floor: "3".into(),
            head_of_department: format!("Dr. {name}"),
            phone: "555-0103".into(),
            total_beds: total,
            occupied_beds: occupied,
        }
    }

    #[test]
    fn free_beds_and_search() {
        let (mut services, _) = services();
        let departments = &mut services.departments;
        departments.create(department("Neurology", 16, 16));
        departments.create(department("Pediatrics", 20, 9));
        departments.create(department("Hospice", 0, 0));

        let free: Vec<String> = departments
            .with_free_beds()
            .into_iter()
            .map(|d| d.name)
            .collect();
        assert_eq!(free, ["Pediatrics"]);
        assert_eq!(departments.search("dr. neuro").len(), 1);
        assert_eq!(departments.list()[0].name, "Hospice");
    }

    #[test]
    fn occupancy_follows_updates() {
        let (mut services, _) = services();
        let created = services
            .departments
            .create(department("Emergency", 30, 10))
            .unwrap();
        let updated = services
            .departments
            .update(
                created.id,
                DepartmentUpdate {
                    occupied_beds: Change::Set(27),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.occupancy_percent(), 90);
        assert_eq!(updated.occupancy_level(), OccupancyLevel::Critical);
    }
}
