/// Scheme marking a path as a resource shipped with brainregister
pub const RESOURCE_SCHEME: &str = "brainregister:";
/// Environment variable overriding the resource directory
pub const RESOURCES_ENV_VAR: &str = "BRAINREGISTER_RESOURCES";
/// Resource directory name inside the crate
pub const RESOURCES_DIR_NAME: &str = "resources";

/// Default name of a generated parameters file
pub const PARAMETERS_FILENAME: &str = "brainregister_parameters.yaml";
/// Default directory a generated parameters file is written to
pub const DEFAULT_OUTPUT_DIR: &str = "brainregister";
/// File looked up when a CCF path points at a directory
pub const CCF_PARAMETERS_FILENAME: &str = "ccf_parameters.yaml";

/// Resource holding the default parameters template
pub const PARAMETERS_TEMPLATE_RESOURCE: &str = "brainregister_parameters.yaml";
/// Resource holding the fullstack/downsampled scaling transform
pub const SCALING_PARAMETERS_RESOURCE: &str = "transformix-parameter-files/00_scaling.txt";

/// Orientation assumed when none is given (Allen CCF convention)
pub const DEFAULT_ORIENTATION: &str = "PIR";

/// Built-in resource names and the file they point to under the resource root
pub const BUILTIN_RESOURCES: &[(&str, &str)] = &[
    ("affine", "elastix-parameter-files/01_affine.txt"),
    ("bspline", "elastix-parameter-files/02_bspline.txt"),
    ("allen-ccf", "allen-ccf/ccf_parameters.yaml"),
];

/// Pre-scheme spellings still found in older parameter files
pub const LEGACY_ALIASES: &[(&str, &str)] = &[
    ("brainregister_affine", "affine"),
    ("brainregister_bspline", "bspline"),
    ("brainregister_allen_ccf", "allen-ccf"),
];

/// Prefix for `brainregister:resource/<path>` references
pub const RESOURCE_PATH_PREFIX: &str = "resource/";

/// Filter selector that disables prefiltering
pub const FILTER_NONE: &str = "none";
/// Filter selector expanded to [`ADAPTIVE_FILTER`]
pub const FILTER_ADAPTIVE: &str = "adaptive";
/// Pipeline used for the `adaptive` prefilter
pub const ADAPTIVE_FILTER: &str = "M,4,4,4";
