pub mod budget_service;
pub mod expense_service;
pub mod ownership_service;
pub mod user_service;

pub use budget_service::{BudgetError, BudgetService, BudgetServiceImpl};
pub use expense_service::{ExpenseError, ExpenseService, ExpenseServiceImpl};
pub use ownership_service::{OwnershipResolver, OwnershipResolverImpl, ResolveError};
pub use user_service::{UserError, UserService, UserServiceImpl};
