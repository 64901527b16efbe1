pub mod budget;
pub mod category;
pub mod expense;
pub mod timestamp;
pub mod user;

pub use budget::{BudgetExpense, BudgetQuery, BudgetView, ExpenseWindowQuery};
pub use category::{Category, SetBudgetRequest, UpsertOutcome};
pub use expense::{
    CategorizedExpense, CreateExpenseRequest, CreatedExpense, Expense, ExpenseDetail,
    ExpenseListItem, NewExpense,
};
pub use user::{CreateUserRequest, CreatedUser, User, UserSummary};
