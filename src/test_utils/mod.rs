#![allow(missing_docs)]

pub(crate) mod html;
pub(crate) mod http;

pub(crate) use html::{
    assert_valid_html, element_text, parse_html_document, parse_html_fragment, select_all,
};
pub(crate) use http::{assert_hx_redirect, assert_status_ok, get_header};
