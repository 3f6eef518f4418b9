//! Expressions and operators

use super::helpers::{map, render, render_with};
use crate::value::Value;

#[test]
fn test_arithmetic_precedence() {
    assert_eq!(render("{{ 1 + 2 * 3 }}"), "7");
    assert_eq!(render("{{ (1 + 2) * 3 }}"), "9");
    assert_eq!(render("{{ -2 ** 2 }}"), "-4");
}

#[test]
fn test_division_forms() {
    assert_eq!(render("{{ 7 / 2 }} {{ 4 / 2 }}"), "3.5 2.0");
    assert_eq!(render("{{ 7 // 2 }} {{ -7 // 2 }}"), "3 -4");
    assert_eq!(render("{{ -7 % 3 }} {{ 7 % -3 }}"), "2 -2");
}

#[test]
fn test_power() {
    assert_eq!(render("{{ 2 ** 10 }}"), "1024");
    assert_eq!(render("{{ 2 ** -1 }}"), "0.5");
}

#[test]
fn test_float_display() {
    assert_eq!(render("{{ 0.1 + 0.2 }}"), "0.30000000000000004");
    assert_eq!(render("{{ 1 + 1.0 }}"), "2.0");
}

#[test]
fn test_sequence_operators() {
    assert_eq!(render("{{ 'ab' * 3 }}"), "ababab");
    assert_eq!(render("{{ [1, 2] + [3] }}"), "[1, 2, 3]");
    assert_eq!(render("{{ [0] * 3 }}"), "[0, 0, 0]");
    assert_eq!(render("{{ '' * 9999999999999 }}{{ [] * 9999999999999 }}"), "[]");
}

#[test]
fn test_chained_comparisons() {
    assert_eq!(render("{{ 1 < 2 < 3 }}"), "True");
    assert_eq!(render("{{ 3 > 2 > 2 }}"), "False");
    assert_eq!(render("{{ 1 == 1.0 }}"), "True");
}

#[test]
fn test_membership_and_identity() {
    assert_eq!(render("{{ 'b' in 'abc' }} {{ 4 not in [1, 2] }}"), "True True");
    assert_eq!(
        render_with("{{ x is None }} {{ x is not None }}", &[("x", Value::Null)]),
        "True False"
    );
    assert_eq!(
        render_with("{{ 'k' in d }}", &[("d", map(&[("k", Value::from(1))]))]),
        "True"
    );
}

#[test]
fn test_boolean_operators_return_operands() {
    assert_eq!(render("{{ 0 or 'fallback' }}"), "fallback");
    assert_eq!(render("{{ 1 and 0 }}"), "0");
    assert_eq!(render("{{ not [] }}"), "True");
}

#[test]
fn test_conditional_expression() {
    assert_eq!(
        render_with("{{ 'yes' if flag else 'no' }}", &[("flag", Value::Bool(false))]),
        "no"
    );
    assert_eq!(render("{{ 1 if True else 2 }}"), "1");
}

#[test]
fn test_percent_formatting() {
    assert_eq!(
        render_with(
            "{{ '%s has %d items' % (name, 3) }}",
            &[("name", Value::from("cart"))]
        ),
        "cart has 3 items"
    );
    assert_eq!(render("{{ '%05.1f' % 3.14159 }}"), "003.1");
    assert_eq!(render("{{ '%-4s|' % 'ab' }}"), "ab  |");
    assert_eq!(render("{{ '%x%%' % 255 }}"), "ff%");
    assert_eq!(render("{{ '%s' % [7] }}"), "7");
}

#[test]
fn test_indexing_and_slicing() {
    let items = Value::from(vec![1_i64, 2, 3]);
    assert_eq!(render_with("{{ items[-1] }}", &[("items", items.clone())]), "3");
    assert_eq!(render_with("{{ items[1:] }}", &[("items", items.clone())]), "[2, 3]");
    assert_eq!(render_with("{{ items[:-1] }}", &[("items", items.clone())]), "[1, 2]");
    assert_eq!(render_with("{{ items[::2] }}", &[("items", items)]), "[1, 3]");
    assert_eq!(render("{{ 'hello'[::-1] }}"), "olleh");
    assert_eq!(render("{{ 'hello'[1:3] }}"), "el");
}

#[test]
fn test_attribute_access_on_maps() {
    let page = map(&[
        ("title", Value::from("Home")),
        ("meta", map(&[("lang", Value::from("en"))])),
    ]);
    assert_eq!(
        render_with("{{ page.title }}/{{ page.meta.lang }}", &[("page", page)]),
        "Home/en"
    );
}

#[test]
fn test_dict_display_and_lookup() {
    assert_eq!(render("% d = {'a': 1, 'b': 2}\n{{ d['b'] }}"), "2");
}

#[test]
fn test_list_comprehension() {
    assert_eq!(render("{{ [x * 2 for x in [1, 2, 3] if x != 2] }}"), "[2, 6]");
}

#[test]
fn test_comprehension_variable_does_not_leak() {
    assert_eq!(
        render("% x = 'outer'\n{{ [x for x in [1]] }} {{ x }}"),
        "[1] outer"
    );
}

#[test]
fn test_adjacent_string_literals() {
    assert_eq!(render("{{ 'a' 'b' }}"), "ab");
}
