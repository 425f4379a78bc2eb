pub mod health;
pub mod tasks;
pub mod users;

use actix_web::web;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .service(users::register)
            .service(users::login)
            .service(users::logout)
            .service(users::logout_all),
    )
    .service(
        web::scope("/users")
            .service(users::get_self)
            .service(users::update_self)
            .service(users::delete_self),
    )
    .service(
        web::scope("/tasks")
            .service(tasks::list_tasks)
            .service(tasks::create_task)
            .service(tasks::get_task)
            .service(tasks::update_task)
            .service(tasks::delete_task),
    );
}
