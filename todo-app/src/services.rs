use todo_data::SqlxService;

use crate::models::{Todo, User, UserSession};

/// Resource services are thin bindings of the generic service to one entity
/// type; ownership checks live above this layer.
pub type UserService<'s> = SqlxService<'s, User>;
pub type TodoService<'s> = SqlxService<'s, Todo>;
pub type UserSessionService<'s> = SqlxService<'s, UserSession>;
