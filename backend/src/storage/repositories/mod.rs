mod card_usage_repository;
mod code_repository;
mod expense_repository;
mod lookup_repository;
mod menu_repository;

pub use card_usage_repository::CardUsageRepository;
pub use code_repository::CodeRepository;
pub use expense_repository::{DetailFilter, ExpenseRepository, GroupUpdate};
pub use lookup_repository::{LookupKind, LookupRepository};
pub use menu_repository::MenuRepository;
