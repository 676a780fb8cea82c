mod person_detail;
mod person_list;

pub use person_detail::PersonDetailView;
pub use person_list::PersonListView;
