//! Custom MiniJinja filters for artifact naming

use crate::util;
use minijinja::Environment;

/// Register all custom filters with the environment
pub fn register_filters(env: &mut Environment<'_>) {
    env.add_filter("pascal_case", filter_pascal_case);
    env.add_filter("camel_case", filter_camel_case);
    env.add_filter("snake_case", filter_snake_case);
    env.add_filter("safe_class_name", filter_safe_class_name);
}

// Filter wrappers that delegate to shared util functions
fn filter_pascal_case(value: &str) -> String {
    util::to_pascal_case(value)
}

fn filter_camel_case(value: &str) -> String {
    util::to_camel_case(value)
}

fn filter_snake_case(value: &str) -> String {
    util::to_snake_case(value)
}

fn filter_safe_class_name(value: &str) -> String {
    util::safe_class_name(value)
}
