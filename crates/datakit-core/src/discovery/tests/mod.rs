pub mod reflector_tests;
