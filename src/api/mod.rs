use rocket::Route;

mod admin;
mod registry;
mod voter;

pub fn routes() -> Vec<Route> {
    let mut routes = Vec::new();
    routes.extend(registry::routes());
    routes.extend(voter::routes());
    routes.extend(admin::routes());
    routes
}
