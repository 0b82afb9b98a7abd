//! Phrase lists matched against lower-cased page text.
//!
//! Pages are mostly English or Spanish, so both languages are listed.

/// Error pages and parked / for-sale domains.
pub const CRITICAL_ERROR_KEYWORDS: &[&str] = &[
    "404 not found",
    "404 - not found",
    "page not found",
    "página no encontrada",
    "error 404",
    "500 internal server error",
    "site not found",
    "domain for sale",
    "dominio en venta",
    "the domain",
    "is for sale",
    "click here to learn more",
    "buy this domain",
    "comprar este dominio",
    "this domain is for sale",
    "este dominio está en venta",
];

/// Ad-blocker walls.
pub const AD_BLOCKER_KEYWORDS: &[&str] = &[
    "ad blocker detected",
    "please disable ad blocker",
    "adblocker detected",
    "disable your ad blocker",
    "turn off ad blocker",
    "bloqueador de anuncios detectado",
    "desactiva el bloqueador",
    "desactive su bloqueador",
    "please disable ad blockers to view this domain",
];

/// Login and institutional access gates.
pub const LOGIN_KEYWORDS: &[&str] = &[
    "find your institution",
    "your university, organization or library",
    "choose your institution",
    "select your institution",
    "institutional login",
    "login institucional",
    "sign in",
    "password required",
    "contraseña requerida",
    "ingrese su contraseña",
    "enter your password",
    "ingresa tu contraseña",
    "introduce tu contraseña",
];
