/*! Cross-module tests for the graph builder and the lazy initialization check.
 *
 * These build classes through the builders and run the full pipeline, covering the shapes javac
 * emits for lazily initialized fields as well as malformed bodies.
 */

mod graph_tests;
