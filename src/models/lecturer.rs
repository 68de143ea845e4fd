use diesel::prelude::*;

#[derive(Debug, Queryable, Selectable, Identifiable, Clone, PartialEq, Eq)]
#[diesel(table_name = crate::schema::lecturers)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Lecturer {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub bio: String,
}
