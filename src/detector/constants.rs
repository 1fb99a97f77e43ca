//! Fixed name tables for Testing Library constructs

pub const SYNC_QUERIES_VARIANTS: &[&str] = &["getBy", "getAllBy", "queryBy", "queryAllBy"];
pub const ASYNC_QUERIES_VARIANTS: &[&str] = &["findBy", "findAllBy"];
pub const ALL_QUERIES_VARIANTS: &[&str] = &[
    "getBy",
    "getAllBy",
    "queryBy",
    "queryAllBy",
    "findBy",
    "findAllBy",
];

pub const ALL_QUERIES_METHODS: &[&str] = &[
    "ByLabelText",
    "ByPlaceholderText",
    "ByText",
    "ByAltText",
    "ByTitle",
    "ByDisplayValue",
    "ByRole",
    "ByTestId",
];

pub const ASYNC_UTILS: &[&str] = &[
    "waitFor",
    "waitForElementToBeRemoved",
    "wait",
    "waitForElement",
    "waitForDomChange",
];

/// Async utils that poll with a callback
pub const WAIT_METHODS: &[&str] = &["waitFor", "waitForElement", "wait"];

pub const DEBUG_UTILS: &[&str] = &[
    "debug",
    "logTestingPlaygroundURL",
    "prettyDOM",
    "logRoles",
    "logDOM",
    "prettyFormat",
];

pub const TESTING_FRAMEWORK_SETUP_HOOKS: &[&str] = &["beforeEach", "beforeAll"];

pub const PRESENCE_MATCHERS: &[&str] = &["toBeInTheDocument", "toBeTruthy", "toBeDefined"];
pub const ABSENCE_MATCHERS: &[&str] = &["toBeNull", "toBeFalsy"];

/// DOM node properties that hand back other nodes
pub const PROPERTIES_RETURNING_NODES: &[&str] = &[
    "activeElement",
    "children",
    "childElementCount",
    "firstChild",
    "firstElementChild",
    "fullscreenElement",
    "lastChild",
    "lastElementChild",
    "nextElementSibling",
    "nextSibling",
    "parentElement",
    "parentNode",
    "pointerLockElement",
    "previousElementSibling",
    "previousSibling",
    "rootNode",
    "scripts",
];

/// DOM node methods that hand back other nodes
pub const METHODS_RETURNING_NODES: &[&str] = &[
    "closest",
    "getElementById",
    "getElementsByClassName",
    "getElementsByName",
    "getElementsByTagName",
    "getElementsByTagNameNS",
    "querySelector",
    "querySelectorAll",
];

/// True for a DOM property or method that returns other nodes
pub fn is_node_returning_name(name: &str) -> bool {
    PROPERTIES_RETURNING_NODES.contains(&name) || METHODS_RETURNING_NODES.contains(&name)
}

/// Official packages that only re-export the DOM core
pub const DOM_TESTING_LIBRARY_MODULES: &[&str] = &["dom-testing-library", "@testing-library/dom"];

pub const USER_EVENT_MODULE: &str = "@testing-library/user-event";
pub const REACT_DOM_TEST_UTILS_MODULE: &str = "react-dom/test-utils";

/// `userEvent` methods that stay synchronous in every major version
pub const USER_EVENT_ASYNC_EXCEPTIONS: &[&str] = &["type", "keyboard"];

/// Names accepted for the value returned by `render`
pub const ALLOWED_RENDER_RESULT_NAMES: &[&str] = &["view", "utils"];

/// fireEvent methods and the userEvent calls that replace them
pub const MAPPING_TO_USER_EVENT: &[(&str, &[&str])] = &[
    ("click", &["click", "type", "selectOptions", "deselectOptions"]),
    ("change", &["upload", "type", "clear", "selectOptions", "deselectOptions"]),
    ("dblClick", &["dblClick"]),
    ("input", &["type", "upload", "selectOptions", "deselectOptions", "paste"]),
    ("keyDown", &["type", "tab"]),
    ("keyPress", &["type"]),
    ("keyUp", &["type", "tab"]),
    ("mouseDown", &["click", "dblClick", "selectOptions", "deselectOptions"]),
    ("mouseEnter", &["hover", "selectOptions", "deselectOptions"]),
    ("mouseLeave", &["unhover"]),
    ("mouseMove", &["hover", "unhover", "selectOptions", "deselectOptions"]),
    ("mouseOut", &["unhover"]),
    ("mouseOver", &["hover", "selectOptions", "deselectOptions"]),
    ("mouseUp", &["click", "dblClick", "selectOptions", "deselectOptions"]),
    ("paste", &["paste"]),
    ("pointerDown", &["click", "dblClick", "selectOptions", "deselectOptions"]),
    ("pointerEnter", &["hover", "selectOptions", "deselectOptions"]),
    ("pointerLeave", &["unhover"]),
    ("pointerMove", &["hover", "unhover", "selectOptions", "deselectOptions"]),
    ("pointerOut", &["unhover"]),
    ("pointerOver", &["hover", "selectOptions", "deselectOptions"]),
    ("pointerUp", &["click", "dblClick", "selectOptions", "deselectOptions"]),
];

/// userEvent replacements for a fireEvent method
pub fn user_event_alternatives(fire_event_method: &str) -> Option<&'static [&'static str]> {
    MAPPING_TO_USER_EVENT
        .iter()
        .find(|(method, _)| *method == fire_event_method)
        .map(|(_, alternatives)| *alternatives)
}

/// `getBy` + `ByText` for every built-in combination
pub fn built_in_query_names() -> impl Iterator<Item = String> {
    ALL_QUERIES_VARIANTS.iter().flat_map(|variant| {
        ALL_QUERIES_METHODS.iter().map(move |method| {
            format!("{}{}", variant, method.trim_start_matches("By"))
        })
    })
}

/// True if `name` is a built-in query such as `getAllByRole`
pub fn is_built_in_query_name(name: &str) -> bool {
    ALL_QUERIES_VARIANTS.iter().any(|variant| {
        name.strip_prefix(variant).is_some_and(|suffix| {
            ALL_QUERIES_METHODS
                .iter()
                .any(|method| method.strip_prefix("By") == Some(suffix))
        })
    })
}
