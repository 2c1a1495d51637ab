// Integration tests against a containerized PostgreSQL instance.
//
// One shared container serves the whole suite; each test creates its own
// database and runs the migrations, so tests run in parallel without
// interfering with each other.

mod helpers;
mod test_translation_repository;
